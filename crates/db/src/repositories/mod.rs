pub mod spot_repo;

pub use spot_repo::SpotRepo;
