/// A library FML downloads at runtime on pre-installer Forge versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmlLibrary {
    pub file_name: &'static str,
    pub sha1: &'static str,
    /// Served from the alternate mirror instead of Forge's own fmllibs host.
    pub alternate_host: bool,
}

const fn lib(file_name: &'static str, sha1: &'static str, alternate_host: bool) -> FmlLibrary {
    FmlLibrary {
        file_name,
        sha1,
        alternate_host,
    }
}

const LIBS_1_3: &[FmlLibrary] = &[
    lib("argo-2.25.jar", "bb672829fde76cb163004752b86b0484bd0a7f4b", false),
    lib("guava-12.0.1.jar", "b8e78b9af7bf45900e14c6f958486b6ca682195f", false),
    lib("asm-all-4.0.jar", "98308890597acb64047f7e896638e0d98753ae82", false),
];

const LIBS_1_4: &[FmlLibrary] = &[
    lib("argo-2.25.jar", "bb672829fde76cb163004752b86b0484bd0a7f4b", false),
    lib("guava-12.0.1.jar", "b8e78b9af7bf45900e14c6f958486b6ca682195f", false),
    lib("asm-all-4.0.jar", "98308890597acb64047f7e896638e0d98753ae82", false),
    lib("bcprov-jdk15on-147.jar", "b6f5d9926b0afbde9f4dbe3db88c5247be7794bb", false),
];

const LIBS_1_5: &[FmlLibrary] = &[
    lib("argo-small-3.2.jar", "58912ea2858d168c50781f956fa5b59f0f7c6b51", false),
    lib("guava-14.0-rc3.jar", "931ae21fa8014c3ce686aaa621eae565fefb1a6a", false),
    lib("asm-all-4.1.jar", "054986e962b88d8660ae4566475658469595ef58", false),
    lib("bcprov-jdk15on-148.jar", "960dea7c9181ba0b17e8bab0c06a43f0a5f04e65", true),
    lib("deobfuscation_data_1.5.zip", "5f7c142d53776f16304c0bbe10542014abad6af8", false),
    lib("scala-library.jar", "458d046151ad179c85429ed7420ffb1eaf6ddf85", true),
];

const LIBS_1_5_1: &[FmlLibrary] = &[
    lib("argo-small-3.2.jar", "58912ea2858d168c50781f956fa5b59f0f7c6b51", false),
    lib("guava-14.0-rc3.jar", "931ae21fa8014c3ce686aaa621eae565fefb1a6a", false),
    lib("asm-all-4.1.jar", "054986e962b88d8660ae4566475658469595ef58", false),
    lib("bcprov-jdk15on-148.jar", "960dea7c9181ba0b17e8bab0c06a43f0a5f04e65", true),
    lib("deobfuscation_data_1.5.1.zip", "22e221a0d89516c1f721d6cab056a7e37471d0a6", false),
    lib("scala-library.jar", "458d046151ad179c85429ed7420ffb1eaf6ddf85", true),
];

const LIBS_1_5_2: &[FmlLibrary] = &[
    lib("argo-small-3.2.jar", "58912ea2858d168c50781f956fa5b59f0f7c6b51", false),
    lib("guava-14.0-rc3.jar", "931ae21fa8014c3ce686aaa621eae565fefb1a6a", false),
    lib("asm-all-4.1.jar", "054986e962b88d8660ae4566475658469595ef58", false),
    lib("bcprov-jdk15on-148.jar", "960dea7c9181ba0b17e8bab0c06a43f0a5f04e65", true),
    lib("deobfuscation_data_1.5.2.zip", "446e55cd986582c70fcf12cb27bc00114c5adfd9", false),
    lib("scala-library.jar", "458d046151ad179c85429ed7420ffb1eaf6ddf85", true),
];

/// FML's runtime libraries for a Minecraft version. Versions FML never
/// downloaded anything for get an empty list.
pub fn fml_libraries_for(mc_version: &str) -> &'static [FmlLibrary] {
    match mc_version {
        "1.3.2" => LIBS_1_3,
        "1.4" | "1.4.1" | "1.4.2" | "1.4.3" | "1.4.4" | "1.4.5" | "1.4.6" | "1.4.7" => LIBS_1_4,
        "1.5" => LIBS_1_5,
        "1.5.1" => LIBS_1_5_1,
        "1.5.2" => LIBS_1_5_2,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        assert_eq!(fml_libraries_for("1.3.2").len(), 3);
        assert_eq!(fml_libraries_for("1.4.7").len(), 4);
        assert_eq!(
            fml_libraries_for("1.5.2")[4].file_name,
            "deobfuscation_data_1.5.2.zip"
        );
        assert!(fml_libraries_for("1.2.5").is_empty());
    }
}
