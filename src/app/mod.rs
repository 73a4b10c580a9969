pub mod ports;
pub mod integrate_use_case;
pub mod audit_use_case;
pub mod mismatch_use_case;
