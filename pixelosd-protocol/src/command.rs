//! Command identifiers and the dispatch table
//!
//! Every command the OSD understands is listed once in the table below,
//! together with the size of its fixed payload, whether it carries a
//! variable payload, and what (if anything) the OSD answers with. The
//! encoder, the response decoder and the tests all consult this table.
//!
//! Id ranges:
//! - 0: error (NAK), payload byte 0 carries the id of the failed command
//! - 1–8: info and queries
//! - 16–19: transaction control
//! - 22–31: drawing state
//! - 40–60: geometry and clipping
//! - 80–88: transformation matrix
//! - 100–101: context stack
//! - 110–111: grid text
//! - 120–122: device control

/// How the payload of an accepted response is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseKind {
    /// Write-only command, no reply expected
    None,
    /// Capability record with a magic tag
    Info,
    /// Character index followed by 64 bytes of glyph data
    Font,
    /// A single byte
    Byte,
    /// A single byte, nonzero meaning true
    Bool,
    /// A little-endian `u32`
    U32,
}

/// Static description of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDescriptor {
    /// Command identifier
    pub id: CommandId,
    /// Exact size of the fixed payload in bytes
    pub fixed_len: usize,
    /// Whether a length-prefixed variable payload follows
    pub variable: bool,
    /// Shape of the reply
    pub response: ResponseKind,
}

impl CommandDescriptor {
    /// Whether the OSD answers this command
    pub const fn expects_response(&self) -> bool {
        !matches!(self.response, ResponseKind::None)
    }
}

macro_rules! command_table {
    ($(
        $(#[$doc:meta])*
        $name:ident = $id:literal, fixed: $fixed:literal, variable: $var:literal, response: $resp:ident;
    )*) => {
        /// Command identifier
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum CommandId {
            $(
                $(#[$doc])*
                $name = $id,
            )*
        }

        impl CommandId {
            /// Every command, in id order
            pub const ALL: &'static [CommandId] = &[$(CommandId::$name),*];

            /// Get the id as a byte value
            pub const fn as_u8(self) -> u8 {
                self as u8
            }

            /// Look up a command from its byte value
            pub const fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($id => Some(CommandId::$name),)*
                    _ => None,
                }
            }

            /// Dispatch table entry for this command
            pub const fn descriptor(self) -> CommandDescriptor {
                match self {
                    $(CommandId::$name => CommandDescriptor {
                        id: CommandId::$name,
                        fixed_len: $fixed,
                        variable: $var,
                        response: ResponseKind::$resp,
                    },)*
                }
            }
        }
    };
}

command_table! {
    /// Negative acknowledgement from the OSD
    Error = 0, fixed: 1, variable: false, response: None;
    /// Query version and capabilities
    Info = 1, fixed: 1, variable: false, response: Info;
    ReadFont = 2, fixed: 2, variable: false, response: Font;
    WriteFont = 3, fixed: 66, variable: false, response: Font;
    GetCamera = 4, fixed: 0, variable: false, response: Byte;
    SetCamera = 5, fixed: 1, variable: false, response: None;
    GetActiveCamera = 6, fixed: 0, variable: false, response: Byte;
    GetOsdEnabled = 7, fixed: 0, variable: false, response: Bool;
    SetOsdEnabled = 8, fixed: 1, variable: false, response: None;

    TransactionBegin = 16, fixed: 0, variable: false, response: None;
    TransactionCommit = 17, fixed: 0, variable: false, response: None;
    /// Begin a transaction and report timing at the given point
    TransactionBeginProfiled = 18, fixed: 3, variable: false, response: None;
    TransactionBeginResetDrawing = 19, fixed: 0, variable: false, response: None;

    SetStrokeColor = 22, fixed: 1, variable: false, response: None;
    SetFillColor = 23, fixed: 1, variable: false, response: None;
    SetStrokeAndFillColor = 24, fixed: 1, variable: false, response: None;
    SetColorInversion = 25, fixed: 1, variable: false, response: None;
    SetPixel = 26, fixed: 4, variable: false, response: None;
    SetPixelToStrokeColor = 27, fixed: 3, variable: false, response: None;
    SetPixelToFillColor = 28, fixed: 3, variable: false, response: None;
    SetStrokeWidth = 29, fixed: 1, variable: false, response: None;
    SetLineOutlineType = 30, fixed: 1, variable: false, response: None;
    SetLineOutlineColor = 31, fixed: 1, variable: false, response: None;

    ClipToRect = 40, fixed: 6, variable: false, response: None;
    ClearScreen = 41, fixed: 0, variable: false, response: None;
    ClearRect = 42, fixed: 6, variable: false, response: None;
    /// Reset colours, stroke, clipping and transform to defaults
    DrawingReset = 43, fixed: 0, variable: false, response: None;
    DrawBitmap = 44, fixed: 7, variable: true, response: None;
    DrawBitmapMask = 45, fixed: 8, variable: true, response: None;
    DrawChar = 46, fixed: 6, variable: false, response: None;
    DrawCharMask = 47, fixed: 7, variable: false, response: None;
    DrawString = 48, fixed: 4, variable: true, response: None;
    DrawStringMask = 49, fixed: 5, variable: true, response: None;
    MoveToPoint = 50, fixed: 3, variable: false, response: None;
    StrokeLineToPoint = 51, fixed: 3, variable: false, response: None;
    StrokeTriangle = 52, fixed: 9, variable: false, response: None;
    FillTriangle = 53, fixed: 9, variable: false, response: None;
    FillStrokeTriangle = 54, fixed: 9, variable: false, response: None;
    StrokeRect = 55, fixed: 6, variable: false, response: None;
    FillRect = 56, fixed: 6, variable: false, response: None;
    FillStrokeRect = 57, fixed: 6, variable: false, response: None;
    StrokeEllipseInRect = 58, fixed: 6, variable: false, response: None;
    FillEllipseInRect = 59, fixed: 6, variable: false, response: None;
    FillStrokeEllipseInRect = 60, fixed: 6, variable: false, response: None;

    CtmReset = 80, fixed: 0, variable: false, response: None;
    CtmSet = 81, fixed: 24, variable: false, response: None;
    CtmTranslate = 82, fixed: 8, variable: false, response: None;
    CtmScale = 83, fixed: 8, variable: false, response: None;
    /// Rotate by an angle in radians
    CtmRotate = 84, fixed: 4, variable: false, response: None;
    CtmRotateAbout = 85, fixed: 12, variable: false, response: None;
    CtmShear = 86, fixed: 8, variable: false, response: None;
    CtmShearAbout = 87, fixed: 16, variable: false, response: None;
    CtmMultiply = 88, fixed: 24, variable: false, response: None;

    ContextPush = 100, fixed: 0, variable: false, response: None;
    ContextPop = 101, fixed: 0, variable: false, response: None;

    DrawGridChar = 110, fixed: 5, variable: false, response: None;
    DrawGridString = 111, fixed: 3, variable: true, response: None;

    Reboot = 120, fixed: 1, variable: false, response: None;
    /// Persist uploaded fonts
    WriteFlash = 121, fixed: 0, variable: false, response: None;
    /// Request a new bit rate; the OSD answers with the rate it applied
    SetDataRate = 122, fixed: 4, variable: false, response: U32;
}
