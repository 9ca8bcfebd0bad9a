/// Describes how many chunks an upload has and how to recognise them.
///
/// The inventory only needs this view of a manifest. Keeping it a trait
/// lets reconciliation run against layouts with arbitrary naming schemes.
pub trait ChunkLayout {
    /// Total number of chunks in the upload.
    fn chunk_count(&self) -> usize;

    /// Container holding the chunk objects and the manifest object.
    fn container(&self) -> &str;

    /// Regular expression matching chunk object names of this upload.
    ///
    /// Capture group 1 must hold the decimal chunk index. Names of
    /// unrelated objects in the same container must not match.
    fn chunk_name_pattern(&self) -> String;
}

impl<T: ChunkLayout + ?Sized> ChunkLayout for &T {
    fn chunk_count(&self) -> usize {
        (**self).chunk_count()
    }

    fn container(&self) -> &str {
        (**self).container()
    }

    fn chunk_name_pattern(&self) -> String {
        (**self).chunk_name_pattern()
    }
}
