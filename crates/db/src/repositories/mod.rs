pub mod activity_repo;
pub mod document_repo;
pub mod package_repo;

pub use activity_repo::ActivityRepo;
pub use document_repo::DocumentRepo;
pub use package_repo::PackageRepo;
