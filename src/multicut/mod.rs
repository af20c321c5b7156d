pub mod components;
pub mod cost;
pub mod graph;
pub mod levels;
pub mod score;
pub mod session;
pub mod validator;

pub use components::{assign_connected_components, ComponentTracker, ComponentUpdate};
pub use cost::Cost;
pub use graph::{ComponentId, Edge, EdgeId, Graph, GraphData, GraphError, Node, NodeId};
pub use score::ScoreOrder;
pub use session::{Session, SessionConfig, SessionError, SessionObserver, SessionState, Toggle};
