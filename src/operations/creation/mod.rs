mod extrude_wall;
mod insert_vertex;
mod make_room;
mod make_template_level;

pub use extrude_wall::ExtrudeWall;
pub use insert_vertex::{InsertVertex, InsertedVertex, VertexSource};
pub use make_room::MakeRoom;
pub use make_template_level::{MakeTemplateLevel, TemplateParams};
