//! Port traits decoupling the domain from I/O.

pub mod config_port;
