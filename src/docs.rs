use utoipa::OpenApi;

use crate::common::response::{ErrorBody, SimpleError};
use crate::modules::image::dto::ImageCompressResponse;
use crate::modules::progress::dto::{ProgressErrorEvent, ProgressEvent};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::compress_video,
        crate::modules::progress::handler::progress_stream,
        crate::modules::image::handler::compress_image,
    ),
    components(
        schemas(
            ErrorBody,
            SimpleError,
            ProgressEvent,
            ProgressErrorEvent,
            ImageCompressResponse,
        )
    ),
    tags(
        (name = "Video", description = "Video compression and progress"),
        (name = "Image", description = "Image compression")
    )
)]
pub struct ApiDoc;
