pub mod commitment;
pub mod conflict;
pub mod coverage;
pub mod leave_balance;
pub mod leave_request;
pub mod role;
pub mod staff;
