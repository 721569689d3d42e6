mod client;
mod links;
mod names;
mod results;
mod types;

pub use client::{
    BuildAction, BuildbotClient, Envelope, Query, RpcEnvelope, Transport, API_PREFIX,
};
pub use links::{
    classify, classify_step_urls, BuildUrl, ClassifiedUrls, RequestUrl, StepLink,
    LAST_SUCCESSFUL_BUILD,
};
pub use names::{BuilderNames, UNKNOWN_BUILDER};
pub use results::{result_class, result_title, BuildResult, IN_PROGRESS};
pub use types::{
    Build, BuildRequest, BuildSet, Builder, Change, Log, LogChunk, MasterRef, Properties,
    Property, SourceStamp, Step, StepUrl, Worker, WorkerInfo,
};
