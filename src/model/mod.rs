// MODEL: Game state and data
pub mod avatar;
pub mod camera;
pub mod raycast;
pub mod scene;
pub mod world;

pub use avatar::{Avatar, BodyPart, LabelId, NameLabel};
pub use camera::Camera;
pub use raycast::{Aabb, Ray, RayHit};
pub use scene::CubeInstance;
pub use world::{Block, BlockId, Ground, World};
