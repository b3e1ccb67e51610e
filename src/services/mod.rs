pub mod resource;

pub use resource::ResourceService;
