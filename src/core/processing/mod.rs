//! Processing stages, in pipeline order: `crop` plans the face crop, `canvas`
//! builds the age-tagged working canvas, `blend` runs the sliding-window
//! transform, `composite` writes the result back. `resize` is shared by the
//! canvas and composite stages; `pipeline` wires them together.
pub mod blend;
pub mod canvas;
pub mod composite;
pub mod crop;
pub mod pipeline;
pub mod resize;
