pub mod done;
pub mod task;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::done::Entity as Done;
    pub use super::task::Entity as Task;
}
