cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        compile_error!("synchrony-shared measures read intervals with std::time::Instant, which is not available on wasm32 targets");
    } else {
        mod native;
        pub use native::instant::Instant;
    }
}
