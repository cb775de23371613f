pub use crate::Error;
pub use crate::NodeId;

// Graph model and storage
pub use crate::model::{Node, NodeKind, Successor, TrackPoint};
pub use crate::store::{GraphStore, MemoryStore, create_graph, dedup, merge_nodes};

// Geometry
pub use crate::geometry::{Distance, DistanceFn};

// Segmentation and simplification
pub use crate::pipeline::{RunReport, SimplifyConfig, SimplifyOptions, run, simplify};
pub use crate::segment::{EsSegmenter, Segment, Segmenter, StationSplitter};
pub use crate::simplify::{Algorithm, anglereduce, rdp, rminner};

pub use crate::combine::anglecombine;
pub use crate::stations::NearestNodeCache;
