pub mod error;
pub mod leave_balance;
pub mod leave_request;
