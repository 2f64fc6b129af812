macro_rules! try_vec {
	($elem:expr; $size:expr, $limit:expr) => {{ $crate::util::alloc::fallible_vec_from_element($elem, $size, $limit)? }};
}

// Shorthand for return Err(TagmeldError::new(ErrorKind::Foo))
//
// Usage:
// - err!(Variant)          -> return Err(TagmeldError::new(ErrorKind::Variant))
// - err!(Variant(Message)) -> return Err(TagmeldError::new(ErrorKind::Variant(Message)))
macro_rules! err {
	($variant:ident) => {
		return Err(crate::error::TagmeldError::new(
			crate::error::ErrorKind::$variant,
		))
	};
	($variant:ident($reason:literal)) => {
		return Err(crate::error::TagmeldError::new(
			crate::error::ErrorKind::$variant($reason),
		))
	};
}

// Shorthand for FileDecodingError::new(TagFormat::Foo, "Message")
//
// Usage:
//
// - decode_err!(Variant, Message)
// - decode_err!(Message)
//
// or bail:
//
// - decode_err!(@BAIL Variant, Message)
// - decode_err!(@BAIL Message)
macro_rules! decode_err {
	($format:ident, $reason:literal) => {
		Into::<crate::error::TagmeldError>::into(crate::error::FileDecodingError::new(
			crate::tag::TagFormat::$format,
			$reason,
		))
	};
	($reason:literal) => {
		Into::<crate::error::TagmeldError>::into(
			crate::error::FileDecodingError::from_description($reason),
		)
	};
	(@BAIL $($format:ident,)? $reason:literal) => {
		return Err(decode_err!($($format,)? $reason))
	};
}

// Shorthand for return Err(ValueError::new(TagFormat::Foo, field, "Message").into())
//
// Usage:
//
// - value_err!(@BAIL Variant, field, Message)
macro_rules! value_err {
	(@BAIL $format:ident, $field:expr, $reason:literal) => {
		return Err(crate::error::TagmeldError::from(
			crate::error::ValueError::new(crate::tag::TagFormat::$format, $field, $reason),
		))
	};
}

pub(crate) use {decode_err, err, try_vec, value_err};
