pub mod aggregate;

pub use aggregate::{Attachment, AttachmentList, UploadResponse};
