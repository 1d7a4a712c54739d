pub mod books;
pub mod users;

pub use books::SqlBookRepository;
pub use users::SqlUserRepository;
