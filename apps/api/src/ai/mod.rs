// AI routes. All model calls go through `inference::InferenceClient`.

pub mod handlers;
