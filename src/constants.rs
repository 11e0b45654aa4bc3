use std::fmt;

/// An error returned when a constant name does not match any known value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumParseError(());

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown constant name")
    }
}

impl std::error::Error for EnumParseError {}

macro_rules! evdev_enum {
    ($t:ty, $($(#[$attr:meta])* $c:ident = $val:expr,)*) => {
        impl $t {
            $($(#[$attr])* pub const $c: Self = Self($val);)*

            const NAME_MAP: &'static [(&'static str, $t)] = &[
                $((stringify!($c), Self::$c),)*
            ];
        }
        impl std::str::FromStr for $t {
            type Err = EnumParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match Self::NAME_MAP.iter().find(|e| e.0 == s) {
                    Some(e) => Ok(e.1),
                    None => Err(EnumParseError(())),
                }
            }
        }
        impl std::fmt::Debug for $t {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                #[allow(unreachable_patterns)]
                match *self {
                    $(Self::$c => f.pad(stringify!($c)),)*
                    _ => write!(f, "unknown {}: {:#x}", stringify!($t), self.0),
                }
            }
        }
        #[cfg(feature = "serde")]
        impl serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::ser::Serializer,
            {
                match Self::NAME_MAP.iter().find(|(_, v)| v == self) {
                    Some((name, _)) => serializer.serialize_str(name),
                    None => serializer.serialize_u16(self.0),
                }
            }
        }
        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                struct Visitor;
                impl<'de> serde::de::Visitor<'de> for Visitor {
                    type Value = $t;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        write!(formatter, "a string with any of the constants in {}", stringify!($t))
                    }

                    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        match <$t>::NAME_MAP.iter().find(|(key, _)| s.eq_ignore_ascii_case(key)) {
                            Some((_, v)) => Ok(*v),
                            None => Err(serde::de::Error::invalid_value(serde::de::Unexpected::Str(s), &self)),
                        }
                    }
                }
                deserializer.deserialize_str(Visitor)
            }
        }
    }
}

/// Event types written to the device.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventType(pub u16);

evdev_enum!(
    EventType,
    /// Starts or stops an uploaded force feedback effect, or sets gain and autocenter.
    FORCEFEEDBACK = 0x15,
);

/// Force feedback effect types, as stored in the `type` field of an effect record.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FFEffectType(pub u16);

evdev_enum!(
    FFEffectType,
    FF_RUMBLE = 0x50,
    FF_PERIODIC = 0x51,
    FF_CONSTANT = 0x52,
    FF_SPRING = 0x53,
    FF_FRICTION = 0x54,
    FF_DAMPER = 0x55,
    FF_INERTIA = 0x56,
    FF_RAMP = 0x57,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints_names() {
        assert_eq!("FF_CONSTANT".parse::<FFEffectType>(), Ok(FFEffectType::FF_CONSTANT));
        assert_eq!(format!("{:?}", EventType::FORCEFEEDBACK), "FORCEFEEDBACK");
        assert_eq!("FORCEFEEDBACK".parse::<EventType>(), Ok(EventType::FORCEFEEDBACK));
        assert_eq!(format!("{:?}", FFEffectType(0x7f)), "unknown FFEffectType: 0x7f");
        assert!("FF_NOPE".parse::<FFEffectType>().is_err());
    }
}
