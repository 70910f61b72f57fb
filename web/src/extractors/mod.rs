pub(crate) mod current_actor;
