//! GitHub release integration

mod release_client;

pub use release_client::{
    ARCHIVE_CONTENT_TYPE, CreatedRelease, ReleaseClient, ReleaseDescriptor, UploadedAsset,
    strip_url_template,
};
