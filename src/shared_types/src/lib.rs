//! TypeScript bindings for the shell are generated by `build.rs` into `generated/`.
