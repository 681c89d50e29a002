//! Store behavior against the recording mock client.
