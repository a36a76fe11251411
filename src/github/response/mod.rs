mod branch_response;
mod pull_response;

pub use branch_response::BranchResponse;
pub use pull_response::PullResponse;
