pub mod loaders;
pub mod problem;

pub use loaders::{load_problem_file, parse_problem_toml};
pub use problem::{
    ProblemKey, ProblemRecord, ProblemSource, RecordUpdate, SubmissionItem, SubmitAck,
    VerificationStatus,
};
