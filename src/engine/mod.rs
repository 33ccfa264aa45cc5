mod codec;
mod history;
mod machine;
mod ranking;
mod scales;
mod state;
mod sync;

pub use codec::{NavigationMode, decode, encode};
pub use history::FragmentHistory;
pub use machine::SelectionMachine;
pub use sync::{
    AnimationPhase, AxisTick, BarChange, BarChartUpdate, BarLayer, ChartView, CirclePlacement,
    CircleUpdate, GuideCircle, Projection, RenderSurface, ViewCommand,
};
