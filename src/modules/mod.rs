pub mod summary_pipeline;
