use std::sync::Arc;

use crate::application::ApplicationServices;
use crate::domain::Passport;

/// Per-request context handed to every resolver.
#[derive(Clone)]
pub struct GraphContext {
    pub passport: Passport,
    pub services: Arc<ApplicationServices>,
}

impl GraphContext {
    pub fn new(passport: Passport, services: Arc<ApplicationServices>) -> Self {
        Self { passport, services }
    }
}
