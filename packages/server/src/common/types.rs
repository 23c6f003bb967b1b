// Types shared by more than one domain.

crate::corpus_enum!(
    /// Who (or what) performed a write: a human curator or the ML pipeline.
    ///
    /// Used for scheduled-item sources, section create sources and the
    /// `deactivate_source` audit columns.
    ActivitySource, pg = "activity_source", label = "activity source" {
        Manual => "MANUAL",
        Ml => "ML",
    }
);
