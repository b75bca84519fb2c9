//! The C ABI surface declared in `bindings/c/tree_sitter/tree-sitter-sifu.h`.

use std::marker::{PhantomData, PhantomPinned};

/// Opaque handle to the grammar descriptor as seen from C.
///
/// Never constructed; it only exists behind `*const TSLanguage`.
#[repr(C)]
pub struct TSLanguage {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Returns the Sifu grammar descriptor.
///
/// The pointer is non-null, refers to static storage, and is identical on
/// every call from every thread.
///
/// The descriptor is not a Tree-sitter parse table. Its first field is a
/// `uint32_t` holding [`LANGUAGE_VERSION`](crate::LANGUAGE_VERSION), which is
/// below every version a Tree-sitter runtime accepts, so
/// `ts_parser_set_language` refuses it cleanly.
#[no_mangle]
pub extern "C" fn tree_sitter_sifu() -> *const TSLanguage {
    crate::LANGUAGE.as_raw()
}
