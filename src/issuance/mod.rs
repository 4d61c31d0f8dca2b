pub mod acm;
pub mod authority;
pub mod certificate;
pub mod dns;
pub mod dns_providers;
pub mod flow;
pub mod issuer;
pub mod locator;
pub mod retry;
pub mod waiter;
