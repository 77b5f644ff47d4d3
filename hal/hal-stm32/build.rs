//! Build script for mcu-hal-stm32
//!
//! Links the prebuilt STM32CubeF4 HAL static library. The directory holding
//! `libstm32f4xx_hal.a` is taken from `STM32CUBE_HAL_LIB_DIR`.

use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=STM32CUBE_HAL_LIB_DIR");
    println!("cargo:rerun-if-changed=build.rs");

    match env::var("STM32CUBE_HAL_LIB_DIR") {
        Ok(dir) => {
            println!("cargo:rustc-link-search=native={}", dir);
            println!("cargo:rustc-link-lib=static=stm32f4xx_hal");
        }
        Err(_) => {
            println!("cargo:warning=STM32CUBE_HAL_LIB_DIR not set, ST HAL symbols must come from elsewhere");
        }
    }
}
