//! Static table of the IR protocol families that can be replayed.

use std::fmt;

/// How a stored field is turned into a transmit parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer code; `0x..` strings are parsed as base 16.
    Numeric,
    /// Timing or byte list; `[ 1, 2, 3 ]` strings are parsed into integers.
    Array,
    /// Passed through untouched.
    Plain,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: Option<i64>,
}

impl FieldSpec {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Numeric,
            default: None,
        }
    }

    const fn array(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Array,
            default: None,
        }
    }

    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Plain,
            default: None,
        }
    }

    const fn or(self, default: i64) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

#[derive(Debug)]
pub struct ProtocolDescriptor {
    pub protocol_name: &'static str,
    pub dispatch_target: &'static str,
    pub fields: &'static [FieldSpec],
}

const DEFAULT_CARRIER_HZ: i64 = 38_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Nec,
    Samsung,
    Samsung36,
    Sony,
    Rc5,
    Rc6,
    Raw,
    Pronto,
    Lg,
    Jvc,
    Panasonic,
    Coolix,
    Dish,
    Pioneer,
    Aeha,
    Midea,
    Haier,
}

impl Protocol {
    pub const ALL: [Protocol; 17] = [
        Protocol::Nec,
        Protocol::Samsung,
        Protocol::Samsung36,
        Protocol::Sony,
        Protocol::Rc5,
        Protocol::Rc6,
        Protocol::Raw,
        Protocol::Pronto,
        Protocol::Lg,
        Protocol::Jvc,
        Protocol::Panasonic,
        Protocol::Coolix,
        Protocol::Dish,
        Protocol::Pioneer,
        Protocol::Aeha,
        Protocol::Midea,
        Protocol::Haier,
    ];

    /// Looks up a protocol by the name the receiver reports, ignoring case.
    pub fn from_name(name: &str) -> Option<Protocol> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|protocol| protocol.descriptor().protocol_name.eq_ignore_ascii_case(name))
    }

    pub fn descriptor(self) -> &'static ProtocolDescriptor {
        match self {
            Protocol::Nec => &NEC,
            Protocol::Samsung => &SAMSUNG,
            Protocol::Samsung36 => &SAMSUNG36,
            Protocol::Sony => &SONY,
            Protocol::Rc5 => &RC5,
            Protocol::Rc6 => &RC6,
            Protocol::Raw => &RAW,
            Protocol::Pronto => &PRONTO,
            Protocol::Lg => &LG,
            Protocol::Jvc => &JVC,
            Protocol::Panasonic => &PANASONIC,
            Protocol::Coolix => &COOLIX,
            Protocol::Dish => &DISH,
            Protocol::Pioneer => &PIONEER,
            Protocol::Aeha => &AEHA,
            Protocol::Midea => &MIDEA,
            Protocol::Haier => &HAIER,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().protocol_name)
    }
}

static NEC: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "NEC",
    dispatch_target: "send_nec",
    fields: &[
        FieldSpec::numeric("address"),
        FieldSpec::numeric("command"),
        FieldSpec::plain("command_repeats").or(1),
    ],
};

static SAMSUNG: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Samsung",
    dispatch_target: "send_samsung",
    fields: &[FieldSpec::numeric("data"), FieldSpec::plain("nbits").or(32)],
};

static SAMSUNG36: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Samsung36",
    dispatch_target: "send_samsung36",
    fields: &[FieldSpec::numeric("address"), FieldSpec::numeric("command")],
};

static SONY: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Sony",
    dispatch_target: "send_sony",
    fields: &[FieldSpec::numeric("data"), FieldSpec::plain("nbits").or(12)],
};

static RC5: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "RC5",
    dispatch_target: "send_rc5",
    fields: &[FieldSpec::numeric("address"), FieldSpec::numeric("command")],
};

static RC6: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "RC6",
    dispatch_target: "send_rc6",
    fields: &[FieldSpec::numeric("address"), FieldSpec::numeric("command")],
};

static RAW: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Raw",
    dispatch_target: "send_raw",
    fields: &[
        FieldSpec::array("code"),
        FieldSpec::plain("carrier_frequency").or(DEFAULT_CARRIER_HZ),
    ],
};

// Pronto `data` is a space-separated hex dump, not a single code.
static PRONTO: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Pronto",
    dispatch_target: "send_pronto",
    fields: &[FieldSpec::plain("data")],
};

static LG: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "LG",
    dispatch_target: "send_lg",
    fields: &[FieldSpec::numeric("data"), FieldSpec::plain("nbits").or(28)],
};

static JVC: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "JVC",
    dispatch_target: "send_jvc",
    fields: &[FieldSpec::numeric("data")],
};

static PANASONIC: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Panasonic",
    dispatch_target: "send_panasonic",
    fields: &[FieldSpec::numeric("address"), FieldSpec::numeric("command")],
};

static COOLIX: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Coolix",
    dispatch_target: "send_coolix",
    fields: &[FieldSpec::numeric("first"), FieldSpec::numeric("second")],
};

static DISH: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Dish",
    dispatch_target: "send_dish",
    fields: &[FieldSpec::numeric("address"), FieldSpec::numeric("command")],
};

static PIONEER: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Pioneer",
    dispatch_target: "send_pioneer",
    fields: &[
        FieldSpec::numeric("rc_code_1"),
        FieldSpec::numeric("rc_code_2"),
    ],
};

static AEHA: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "AEHA",
    dispatch_target: "send_aeha",
    fields: &[
        FieldSpec::numeric("address"),
        FieldSpec::array("data"),
        FieldSpec::plain("carrier_frequency").or(DEFAULT_CARRIER_HZ),
    ],
};

static MIDEA: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Midea",
    dispatch_target: "send_midea",
    fields: &[FieldSpec::array("code")],
};

static HAIER: ProtocolDescriptor = ProtocolDescriptor {
    protocol_name: "Haier",
    dispatch_target: "send_haier",
    fields: &[FieldSpec::array("code")],
};
