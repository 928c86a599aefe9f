//! eTOXlab engine: external operations, batch prediction and job workers.
mod batch;
mod config;
mod dispatcher;
mod persist;
mod plugin;
mod process;
mod queue;
mod repository;
mod serialize;
mod split;
mod types;
mod workflow;

pub use batch::{BatchPredictor, NO_INPUT};
pub use config::{EngineConfig, AUTOMATED_INPUT, AUTOMATED_LIBRARY_PATHS};
pub use dispatcher::JobDispatcher;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use plugin::{ExecutablePlugin, ModelPlugin, PluginRegistry};
pub use process::{abort_on_marker, CommandRunner, CommandSpec, LineAction, ProcessInvoker, ProcessOutput};
pub use queue::{result_queue, QueueSender, ResultQueue};
pub use repository::ModelRepository;
pub use serialize::{render_interactive, to_triples, write_programmatic, ResultTriple, TripleValue};
pub use split::{split_records, RecordSplitter, TERMINATOR};
pub use types::{
    BatchResult, InputError, InvokeError, MoleculeRecord, PluginLoadError, PredictedItem,
    PredictionOutcome,
};
pub use workflow::ModelWorkflow;
