pub mod server;

pub mod prelude {
    pub use super::server::Entity as Server;
    pub use super::server::Model as ServerModel;
    pub use super::server::ActiveModel as ServerActiveModel;
    pub use super::server::Column as ServerColumn;
}
