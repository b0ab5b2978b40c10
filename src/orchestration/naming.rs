//! Output naming strategy

use crate::codec::TransformOutput;

/// Derives the storage-relative name for one rendered asset.
pub trait OutputNamer: Send + Sync {
    fn output_name(&self, output: &TransformOutput) -> String;
}

/// Default content-addressed layout: the first two hex chars of the
/// content hash become a subdirectory, the rest plus the rendered width
/// the filename.
#[derive(Debug, Clone, Default)]
pub struct HashedNamer;

impl OutputNamer for HashedNamer {
    fn output_name(&self, output: &TransformOutput) -> String {
        let hash = &output.content_hash;
        if hash.len() > 2 {
            format!(
                "{}/{}-{}.{}",
                &hash[..2],
                &hash[2..],
                output.width,
                output.format_extension
            )
        } else {
            format!("{}-{}.{}", hash, output.width, output.format_extension)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(hash: &str, width: u32, ext: &str) -> TransformOutput {
        TransformOutput {
            bytes: vec![],
            width,
            height: width,
            format_extension: ext.to_string(),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn hash_prefix_becomes_subdirectory() {
        let name = HashedNamer.output_name(&output("ab34ef", 800, "jpg"));
        assert_eq!(name, "ab/34ef-800.jpg");
    }

    #[test]
    fn short_hash_skips_subdirectory() {
        let name = HashedNamer.output_name(&output("ab", 10, "png"));
        assert_eq!(name, "ab-10.png");
    }
}
