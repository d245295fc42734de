pub mod lmstudio;
pub(crate) mod openai_compat_translate;
pub(crate) mod translator_contract;
