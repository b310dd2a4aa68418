pub mod petition_repo;
pub mod report_repo;
pub mod user_repo;

pub use petition_repo::PetitionRepo;
pub use report_repo::ReportRepo;
pub use user_repo::UserRepo;
