pub(crate) mod auth0_controller;
pub(crate) mod health_check_controller;
pub(crate) mod home_controller;
