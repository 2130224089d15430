//! Typed commands
//!
//! Each [`OsdCommand`] variant knows its id, how to lay out its fixed
//! payload and which bytes (if any) go into the variable payload. Encoding
//! goes through the same [`write_frame`](crate::frame::write_frame) path
//! for every command.

use heapless::Vec;

use crate::command::CommandId;
use crate::frame::{encode_frame, FrameError};
use crate::geometry::{BitmapOptions, Color, Outline, Point, Rect, Triangle};
use crate::response::CharData;

/// Largest fixed payload of any command (font upload)
pub const MAX_FIXED_LEN: usize = 66;

/// Fixed payload buffer
pub type FixedPayload = Vec<u8, MAX_FIXED_LEN>;

/// Version byte sent with the info request
pub const INFO_REQUEST_VERSION: u8 = 1;

/// A 3x2 affine transformation matrix
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Matrix {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub m31: f32,
    pub m32: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        m31: 0.0,
        m32: 0.0,
    };
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Every command the host can send
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OsdCommand<'a> {
    Info,
    ReadFont {
        character: u16,
    },
    WriteFont {
        character: u16,
        data: &'a CharData,
    },
    GetCamera,
    SetCamera(u8),
    GetActiveCamera,
    GetOsdEnabled,
    SetOsdEnabled(bool),

    TransactionBegin,
    TransactionCommit,
    TransactionBeginProfiled(Point),
    TransactionBeginResetDrawing,

    SetStrokeColor(Color),
    SetFillColor(Color),
    SetStrokeAndFillColor(Color),
    SetColorInversion(bool),
    SetPixel {
        point: Point,
        color: Color,
    },
    SetPixelToStrokeColor(Point),
    SetPixelToFillColor(Point),
    SetStrokeWidth(u8),
    SetLineOutlineType(Outline),
    SetLineOutlineColor(Color),

    ClipToRect(Rect),
    ClearScreen,
    ClearRect(Rect),
    DrawingReset,
    DrawBitmap {
        rect: Rect,
        options: BitmapOptions,
        bitmap: &'a [u8],
    },
    DrawBitmapMask {
        rect: Rect,
        options: BitmapOptions,
        color: Color,
        bitmap: &'a [u8],
    },
    DrawChar {
        point: Point,
        character: u16,
        options: BitmapOptions,
    },
    DrawCharMask {
        point: Point,
        character: u16,
        options: BitmapOptions,
        color: Color,
    },
    DrawString {
        point: Point,
        options: BitmapOptions,
        text: &'a [u8],
    },
    DrawStringMask {
        point: Point,
        options: BitmapOptions,
        color: Color,
        text: &'a [u8],
    },
    MoveToPoint(Point),
    StrokeLineToPoint(Point),
    StrokeTriangle(Triangle),
    FillTriangle(Triangle),
    FillStrokeTriangle(Triangle),
    StrokeRect(Rect),
    FillRect(Rect),
    FillStrokeRect(Rect),
    StrokeEllipseInRect(Rect),
    FillEllipseInRect(Rect),
    FillStrokeEllipseInRect(Rect),

    CtmReset,
    CtmSet(Matrix),
    CtmTranslate {
        tx: f32,
        ty: f32,
    },
    CtmScale {
        sx: f32,
        sy: f32,
    },
    /// Angle in radians
    CtmRotate(f32),
    CtmRotateAbout {
        angle: f32,
        cx: f32,
        cy: f32,
    },
    CtmShear {
        sx: f32,
        sy: f32,
    },
    CtmShearAbout {
        sx: f32,
        sy: f32,
        cx: f32,
        cy: f32,
    },
    CtmMultiply(Matrix),

    ContextPush,
    ContextPop,

    DrawGridChar {
        column: u8,
        row: u8,
        character: u16,
        options: BitmapOptions,
    },
    DrawGridString {
        column: u8,
        row: u8,
        options: BitmapOptions,
        text: &'a [u8],
    },

    Reboot {
        to_bootloader: bool,
    },
    WriteFlash,
    SetDataRate(u32),
}

/// Little-endian field writer over a fixed payload buffer
struct Fields(FixedPayload);

impl Fields {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn bytes(mut self, bytes: &[u8]) -> Result<Self, FrameError> {
        self.0
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(self)
    }

    fn u8(self, value: u8) -> Result<Self, FrameError> {
        self.bytes(&[value])
    }

    fn u16(self, value: u16) -> Result<Self, FrameError> {
        self.bytes(&value.to_le_bytes())
    }

    fn u32(self, value: u32) -> Result<Self, FrameError> {
        self.bytes(&value.to_le_bytes())
    }

    fn f32(self, value: f32) -> Result<Self, FrameError> {
        self.bytes(&value.to_le_bytes())
    }

    fn matrix(self, m: &Matrix) -> Result<Self, FrameError> {
        self.f32(m.m11)?
            .f32(m.m12)?
            .f32(m.m21)?
            .f32(m.m22)?
            .f32(m.m31)?
            .f32(m.m32)
    }

    fn finish(self) -> FixedPayload {
        self.0
    }
}

impl OsdCommand<'_> {
    /// Command identifier
    pub fn id(&self) -> CommandId {
        use OsdCommand::*;
        match self {
            Info => CommandId::Info,
            ReadFont { .. } => CommandId::ReadFont,
            WriteFont { .. } => CommandId::WriteFont,
            GetCamera => CommandId::GetCamera,
            SetCamera(_) => CommandId::SetCamera,
            GetActiveCamera => CommandId::GetActiveCamera,
            GetOsdEnabled => CommandId::GetOsdEnabled,
            SetOsdEnabled(_) => CommandId::SetOsdEnabled,
            TransactionBegin => CommandId::TransactionBegin,
            TransactionCommit => CommandId::TransactionCommit,
            TransactionBeginProfiled(_) => CommandId::TransactionBeginProfiled,
            TransactionBeginResetDrawing => CommandId::TransactionBeginResetDrawing,
            SetStrokeColor(_) => CommandId::SetStrokeColor,
            SetFillColor(_) => CommandId::SetFillColor,
            SetStrokeAndFillColor(_) => CommandId::SetStrokeAndFillColor,
            SetColorInversion(_) => CommandId::SetColorInversion,
            SetPixel { .. } => CommandId::SetPixel,
            SetPixelToStrokeColor(_) => CommandId::SetPixelToStrokeColor,
            SetPixelToFillColor(_) => CommandId::SetPixelToFillColor,
            SetStrokeWidth(_) => CommandId::SetStrokeWidth,
            SetLineOutlineType(_) => CommandId::SetLineOutlineType,
            SetLineOutlineColor(_) => CommandId::SetLineOutlineColor,
            ClipToRect(_) => CommandId::ClipToRect,
            ClearScreen => CommandId::ClearScreen,
            ClearRect(_) => CommandId::ClearRect,
            DrawingReset => CommandId::DrawingReset,
            DrawBitmap { .. } => CommandId::DrawBitmap,
            DrawBitmapMask { .. } => CommandId::DrawBitmapMask,
            DrawChar { .. } => CommandId::DrawChar,
            DrawCharMask { .. } => CommandId::DrawCharMask,
            DrawString { .. } => CommandId::DrawString,
            DrawStringMask { .. } => CommandId::DrawStringMask,
            MoveToPoint(_) => CommandId::MoveToPoint,
            StrokeLineToPoint(_) => CommandId::StrokeLineToPoint,
            StrokeTriangle(_) => CommandId::StrokeTriangle,
            FillTriangle(_) => CommandId::FillTriangle,
            FillStrokeTriangle(_) => CommandId::FillStrokeTriangle,
            StrokeRect(_) => CommandId::StrokeRect,
            FillRect(_) => CommandId::FillRect,
            FillStrokeRect(_) => CommandId::FillStrokeRect,
            StrokeEllipseInRect(_) => CommandId::StrokeEllipseInRect,
            FillEllipseInRect(_) => CommandId::FillEllipseInRect,
            FillStrokeEllipseInRect(_) => CommandId::FillStrokeEllipseInRect,
            CtmReset => CommandId::CtmReset,
            CtmSet(_) => CommandId::CtmSet,
            CtmTranslate { .. } => CommandId::CtmTranslate,
            CtmScale { .. } => CommandId::CtmScale,
            CtmRotate(_) => CommandId::CtmRotate,
            CtmRotateAbout { .. } => CommandId::CtmRotateAbout,
            CtmShear { .. } => CommandId::CtmShear,
            CtmShearAbout { .. } => CommandId::CtmShearAbout,
            CtmMultiply(_) => CommandId::CtmMultiply,
            ContextPush => CommandId::ContextPush,
            ContextPop => CommandId::ContextPop,
            DrawGridChar { .. } => CommandId::DrawGridChar,
            DrawGridString { .. } => CommandId::DrawGridString,
            Reboot { .. } => CommandId::Reboot,
            WriteFlash => CommandId::WriteFlash,
            SetDataRate(_) => CommandId::SetDataRate,
        }
    }

    /// Packed fixed payload, in wire field order
    pub fn fixed_payload(&self) -> Result<FixedPayload, FrameError> {
        use OsdCommand::*;
        let f = Fields::new();
        let f = match self {
            Info => f.u8(INFO_REQUEST_VERSION)?,
            ReadFont { character } => f.u16(*character)?,
            WriteFont { character, data } => f.u16(*character)?.bytes(&data.to_bytes())?,
            SetCamera(camera) => f.u8(*camera)?,
            SetOsdEnabled(enabled) | SetColorInversion(enabled) => f.u8(*enabled as u8)?,
            TransactionBeginProfiled(point)
            | SetPixelToStrokeColor(point)
            | SetPixelToFillColor(point)
            | MoveToPoint(point)
            | StrokeLineToPoint(point) => f.bytes(&point.pack())?,
            SetStrokeColor(color)
            | SetFillColor(color)
            | SetStrokeAndFillColor(color)
            | SetLineOutlineColor(color) => f.u8(color.as_u8())?,
            SetPixel { point, color } => f.bytes(&point.pack())?.u8(color.as_u8())?,
            SetStrokeWidth(width) => f.u8(*width)?,
            SetLineOutlineType(outline) => f.u8(outline.bits())?,
            ClipToRect(rect)
            | ClearRect(rect)
            | StrokeRect(rect)
            | FillRect(rect)
            | FillStrokeRect(rect)
            | StrokeEllipseInRect(rect)
            | FillEllipseInRect(rect)
            | FillStrokeEllipseInRect(rect) => f.bytes(&rect.pack())?,
            DrawBitmap { rect, options, .. } => f.bytes(&rect.pack())?.u8(options.0)?,
            DrawBitmapMask {
                rect,
                options,
                color,
                ..
            } => f.bytes(&rect.pack())?.u8(options.0)?.u8(color.as_u8())?,
            DrawChar {
                point,
                character,
                options,
            } => f.bytes(&point.pack())?.u16(*character)?.u8(options.0)?,
            DrawCharMask {
                point,
                character,
                options,
                color,
            } => f
                .bytes(&point.pack())?
                .u16(*character)?
                .u8(options.0)?
                .u8(color.as_u8())?,
            DrawString { point, options, .. } => f.bytes(&point.pack())?.u8(options.0)?,
            DrawStringMask {
                point,
                options,
                color,
                ..
            } => f.bytes(&point.pack())?.u8(options.0)?.u8(color.as_u8())?,
            StrokeTriangle(tri) | FillTriangle(tri) | FillStrokeTriangle(tri) => {
                f.bytes(&tri.pack())?
            }
            CtmSet(m) | CtmMultiply(m) => f.matrix(m)?,
            CtmTranslate { tx: x, ty: y }
            | CtmScale { sx: x, sy: y }
            | CtmShear { sx: x, sy: y } => f.f32(*x)?.f32(*y)?,
            CtmRotate(angle) => f.f32(*angle)?,
            CtmRotateAbout { angle, cx, cy } => f.f32(*angle)?.f32(*cx)?.f32(*cy)?,
            CtmShearAbout { sx, sy, cx, cy } => f.f32(*sx)?.f32(*sy)?.f32(*cx)?.f32(*cy)?,
            DrawGridChar {
                column,
                row,
                character,
                options,
            } => f.u8(*column)?.u8(*row)?.u16(*character)?.u8(options.0)?,
            DrawGridString {
                column,
                row,
                options,
                ..
            } => f.u8(*column)?.u8(*row)?.u8(options.0)?,
            Reboot { to_bootloader } => f.u8(*to_bootloader as u8)?,
            SetDataRate(rate) => f.u32(*rate)?,
            GetCamera | GetActiveCamera | GetOsdEnabled | TransactionBegin | TransactionCommit
            | TransactionBeginResetDrawing | ClearScreen | DrawingReset | CtmReset
            | ContextPush | ContextPop | WriteFlash => f,
        };
        Ok(f.finish())
    }

    /// Length-prefixed trailing payload, if this command carries one
    pub fn variable(&self) -> Option<&[u8]> {
        use OsdCommand::*;
        match self {
            DrawBitmap { bitmap, .. } | DrawBitmapMask { bitmap, .. } => Some(*bitmap),
            DrawString { text, .. }
            | DrawStringMask { text, .. }
            | DrawGridString { text, .. } => Some(*text),
            _ => None,
        }
    }

    /// Encode the complete frame into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let fixed = self.fixed_payload()?;
        encode_frame(self.id().as_u8(), &fixed, self.variable(), buffer)
    }
}
