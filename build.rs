fn main() {
    // 仅桌面外壳需要生成 Tauri 上下文
    #[cfg(feature = "desktop")]
    {
        #[cfg(target_os = "macos")]
        {
            println!("cargo:rustc-env=MACOSX_DEPLOYMENT_TARGET=10.13");
            std::env::set_var(
                "TAURI_BUNDLE_NSCameraUsageDescription",
                "本应用需要摄像头权限来扫描商品条码。扫描结果仅存储在本地。",
            );
        }

        tauri_build::build()
    }
}
