use swfplace_bit_buf::{BitReader, BitWriter};

use super::{Fixed16, Fixed8, Rgba};
use crate::{DecodeError, EncodeError, Field, OutOfRange};

const FIELD: Field = Field::SurfaceFilterList;

/// The flag bits and pass count shared by the shadow-like filters.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterMode {
    pub inner: bool,
    pub knockout: bool,
    pub composite_source: bool,
    /// Only stored by the bevel and gradient filters.
    pub on_top: bool,
    pub passes: u8,
}

impl FilterMode {
    // Filters with an `on_top` bit have one bit less for passes.
    fn read(reader: &mut BitReader<'_>, with_on_top: bool) -> Result<Self, DecodeError> {
        let inner = reader.read_bit()?;
        let knockout = reader.read_bit()?;
        let composite_source = reader.read_bit()?;
        let (on_top, passes) = if with_on_top {
            (reader.read_bit()?, reader.read_ub(4)?)
        } else {
            (false, reader.read_ub(5)?)
        };

        Ok(Self {
            inner,
            knockout,
            composite_source,
            on_top,
            passes: passes as u8,
        })
    }

    fn write(&self, writer: &mut BitWriter, with_on_top: bool) -> Result<(), EncodeError> {
        writer.write_bit(self.inner).out_of_range(FIELD)?;
        writer.write_bit(self.knockout).out_of_range(FIELD)?;
        writer.write_bit(self.composite_source).out_of_range(FIELD)?;
        if with_on_top {
            writer.write_bit(self.on_top).out_of_range(FIELD)?;
            writer.write_ub(self.passes as u32, 4).out_of_range(FIELD)
        } else if self.on_top {
            Err(EncodeError::ValueOutOfRange { field: FIELD })
        } else {
            writer.write_ub(self.passes as u32, 5).out_of_range(FIELD)
        }
    }
}

/// The blur parameters shared by all shadow-like filters.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Blur {
    pub blur_x: Fixed16,
    pub blur_y: Fixed16,
}

impl Blur {
    fn read(reader: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            blur_x: Fixed16(reader.read_i32()?),
            blur_y: Fixed16(reader.read_i32()?),
        })
    }

    fn write(&self, writer: &mut BitWriter) {
        writer.write_i32(self.blur_x.0);
        writer.write_i32(self.blur_y.0);
    }
}

/// The direction in which a shadow is cast.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Radians.
    pub angle: Fixed16,
    /// Pixels.
    pub distance: Fixed16,
}

impl Offset {
    fn read(reader: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            angle: Fixed16(reader.read_i32()?),
            distance: Fixed16(reader.read_i32()?),
        })
    }

    fn write(&self, writer: &mut BitWriter) {
        writer.write_i32(self.angle.0);
        writer.write_i32(self.distance.0);
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DropShadowFilter {
    pub color: Rgba,
    pub blur: Blur,
    pub offset: Offset,
    pub strength: Fixed8,
    pub mode: FilterMode,
}

/// The reserved bits after the pass count are kept as read and do
/// not take part in comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default)]
pub struct BlurFilter {
    pub blur: Blur,
    pub passes: u8,
    #[cfg_attr(feature = "serde", serde(skip))]
    reserved: u8,
}

impl BlurFilter {
    pub fn new(blur: Blur, passes: u8) -> Self {
        Self {
            blur,
            passes,
            reserved: 0,
        }
    }
}

impl PartialEq for BlurFilter {
    fn eq(&self, other: &Self) -> bool {
        self.blur == other.blur && self.passes == other.passes
    }
}

impl Eq for BlurFilter {}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlowFilter {
    pub color: Rgba,
    pub blur: Blur,
    pub strength: Fixed8,
    pub mode: FilterMode,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BevelFilter {
    pub shadow_color: Rgba,
    pub highlight_color: Rgba,
    pub blur: Blur,
    pub offset: Offset,
    pub strength: Fixed8,
    pub mode: FilterMode,
}

/// One color stop of a gradient filter.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GradientStop {
    pub color: Rgba,
    pub ratio: u8,
}

/// The layout of both the gradient glow and gradient bevel filters.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GradientFilter {
    pub stops: Vec<GradientStop>,
    pub blur: Blur,
    pub offset: Offset,
    pub strength: Fixed8,
    pub mode: FilterMode,
}

/// The reserved bits before the flags are kept as read and do not
/// take part in comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default)]
pub struct ConvolutionFilter {
    pub matrix_x: u8,
    pub matrix_y: u8,
    pub divisor: f32,
    pub bias: f32,
    /// Row-major, `matrix_x * matrix_y` entries.
    pub matrix: Vec<f32>,
    pub default_color: Rgba,
    pub clamp: bool,
    pub preserve_alpha: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    reserved: u8,
}

impl PartialEq for ConvolutionFilter {
    fn eq(&self, other: &Self) -> bool {
        self.matrix_x == other.matrix_x
            && self.matrix_y == other.matrix_y
            && self.divisor == other.divisor
            && self.bias == other.bias
            && self.matrix == other.matrix
            && self.default_color == other.default_color
            && self.clamp == other.clamp
            && self.preserve_alpha == other.preserve_alpha
    }
}

/// A surface filter applied to a placed display object.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    DropShadow(DropShadowFilter),
    Blur(BlurFilter),
    Glow(GlowFilter),
    Bevel(BevelFilter),
    GradientGlow(GradientFilter),
    Convolution(ConvolutionFilter),
    /// A 4x5 color matrix, row-major.
    ColorMatrix(Box<[f32; 20]>),
    GradientBevel(GradientFilter),
}

impl Filter {
    /// Gets the `FilterID` of the filter.
    pub fn id(&self) -> u8 {
        match self {
            Self::DropShadow(..) => 0,
            Self::Blur(..) => 1,
            Self::Glow(..) => 2,
            Self::Bevel(..) => 3,
            Self::GradientGlow(..) => 4,
            Self::Convolution(..) => 5,
            Self::ColorMatrix(..) => 6,
            Self::GradientBevel(..) => 7,
        }
    }

    pub fn read(reader: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let id = reader.read_u8()?;
        log::trace!("Reading filter with id {id}");

        let filter = match id {
            0 => Self::DropShadow(DropShadowFilter {
                color: Rgba::read(reader)?,
                blur: Blur::read(reader)?,
                offset: Offset::read(reader)?,
                strength: Fixed8(reader.read_i16()?),
                mode: FilterMode::read(reader, false)?,
            }),

            1 => {
                let blur = Blur::read(reader)?;
                let passes = reader.read_ub(5)? as u8;
                let reserved = reader.read_ub(3)? as u8;

                Self::Blur(BlurFilter {
                    blur,
                    passes,
                    reserved,
                })
            }

            2 => Self::Glow(GlowFilter {
                color: Rgba::read(reader)?,
                blur: Blur::read(reader)?,
                strength: Fixed8(reader.read_i16()?),
                mode: FilterMode::read(reader, false)?,
            }),

            3 => Self::Bevel(BevelFilter {
                shadow_color: Rgba::read(reader)?,
                highlight_color: Rgba::read(reader)?,
                blur: Blur::read(reader)?,
                offset: Offset::read(reader)?,
                strength: Fixed8(reader.read_i16()?),
                mode: FilterMode::read(reader, true)?,
            }),

            4 => Self::GradientGlow(GradientFilter::read(reader)?),

            5 => {
                let matrix_x = reader.read_u8()?;
                let matrix_y = reader.read_u8()?;
                let divisor = reader.read_f32()?;
                let bias = reader.read_f32()?;

                let len = matrix_x as usize * matrix_y as usize;
                let mut matrix = Vec::with_capacity(len);
                for _ in 0..len {
                    matrix.push(reader.read_f32()?);
                }

                let default_color = Rgba::read(reader)?;
                let reserved = reader.read_ub(6)? as u8;
                let clamp = reader.read_bit()?;
                let preserve_alpha = reader.read_bit()?;

                Self::Convolution(ConvolutionFilter {
                    matrix_x,
                    matrix_y,
                    divisor,
                    bias,
                    matrix,
                    default_color,
                    clamp,
                    preserve_alpha,
                    reserved,
                })
            }

            6 => {
                let mut matrix = Box::new([0.0; 20]);
                for v in matrix.iter_mut() {
                    *v = reader.read_f32()?;
                }

                Self::ColorMatrix(matrix)
            }

            7 => Self::GradientBevel(GradientFilter::read(reader)?),

            _ => {
                return Err(DecodeError::MalformedField {
                    field: FIELD,
                    reason: "unknown filter id",
                })
            }
        };

        reader.realign_to_byte();
        Ok(filter)
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        writer.write_u8(self.id());

        match self {
            Self::DropShadow(f) => {
                f.color.write(writer);
                f.blur.write(writer);
                f.offset.write(writer);
                writer.write_i16(f.strength.0);
                f.mode.write(writer, false)?;
            }

            Self::Blur(f) => {
                f.blur.write(writer);
                writer.write_ub(f.passes as u32, 5).out_of_range(FIELD)?;
                writer
                    .write_ub(f.reserved as u32, 3)
                    .out_of_range(FIELD)?;
            }

            Self::Glow(f) => {
                f.color.write(writer);
                f.blur.write(writer);
                writer.write_i16(f.strength.0);
                f.mode.write(writer, false)?;
            }

            Self::Bevel(f) => {
                f.shadow_color.write(writer);
                f.highlight_color.write(writer);
                f.blur.write(writer);
                f.offset.write(writer);
                writer.write_i16(f.strength.0);
                f.mode.write(writer, true)?;
            }

            Self::GradientGlow(f) | Self::GradientBevel(f) => f.write(writer)?,

            Self::Convolution(f) => {
                if f.matrix.len() != f.matrix_x as usize * f.matrix_y as usize {
                    return Err(EncodeError::ValueOutOfRange { field: FIELD });
                }

                writer.write_u8(f.matrix_x);
                writer.write_u8(f.matrix_y);
                writer.write_f32(f.divisor);
                writer.write_f32(f.bias);
                for &v in &f.matrix {
                    writer.write_f32(v);
                }
                f.default_color.write(writer);
                writer
                    .write_ub(f.reserved as u32, 6)
                    .out_of_range(FIELD)?;
                writer.write_bit(f.clamp).out_of_range(FIELD)?;
                writer.write_bit(f.preserve_alpha).out_of_range(FIELD)?;
            }

            Self::ColorMatrix(matrix) => {
                for &v in matrix.iter() {
                    writer.write_f32(v);
                }
            }
        }

        writer.realign_to_byte();
        Ok(())
    }
}

impl GradientFilter {
    fn read(reader: &mut BitReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.read_u8()? as usize;

        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            colors.push(Rgba::read(reader)?);
        }

        let mut stops = Vec::with_capacity(count);
        for color in colors {
            stops.push(GradientStop {
                color,
                ratio: reader.read_u8()?,
            });
        }

        Ok(Self {
            stops,
            blur: Blur::read(reader)?,
            offset: Offset::read(reader)?,
            strength: Fixed8(reader.read_i16()?),
            mode: FilterMode::read(reader, true)?,
        })
    }

    fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        let count =
            u8::try_from(self.stops.len()).map_err(|_| EncodeError::ValueOutOfRange { field: FIELD })?;

        writer.write_u8(count);
        for stop in &self.stops {
            stop.color.write(writer);
        }
        for stop in &self.stops {
            writer.write_u8(stop.ratio);
        }

        self.blur.write(writer);
        self.offset.write(writer);
        writer.write_i16(self.strength.0);
        self.mode.write(writer, true)
    }
}

/// Reads a `FILTERLIST` structure.
pub fn read_filter_list(reader: &mut BitReader<'_>) -> Result<Vec<Filter>, DecodeError> {
    let count = reader.read_u8()? as usize;

    let mut filters = Vec::with_capacity(count);
    for _ in 0..count {
        filters.push(Filter::read(reader)?);
    }

    Ok(filters)
}

/// Writes a `FILTERLIST` structure.
pub fn write_filter_list(filters: &[Filter], writer: &mut BitWriter) -> Result<(), EncodeError> {
    let count =
        u8::try_from(filters.len()).map_err(|_| EncodeError::ValueOutOfRange { field: FIELD })?;

    writer.write_u8(count);
    for filter in filters {
        filter.write(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(filter: Filter) -> Vec<u8> {
        let mut writer = BitWriter::new();
        filter.write(&mut writer).unwrap();
        let data = writer.into_inner();

        let mut reader = BitReader::new(&data);
        assert_eq!(Filter::read(&mut reader).unwrap(), filter);
        assert!(reader.is_empty());

        data
    }

    #[test]
    fn drop_shadow_layout() {
        let data = roundtrip(Filter::DropShadow(DropShadowFilter {
            color: Rgba::new(0, 0, 0, 0xFF),
            blur: Blur {
                blur_x: Fixed16::from_f64(4.0),
                blur_y: Fixed16::from_f64(4.0),
            },
            offset: Offset {
                angle: Fixed16(0xC90F),
                distance: Fixed16::from_f64(4.0),
            },
            strength: Fixed8::ONE,
            mode: FilterMode {
                composite_source: true,
                passes: 1,
                ..Default::default()
            },
        }));

        // id + color + 4 FIXED + FIXED8 + flags byte.
        assert_eq!(data.len(), 1 + 4 + 16 + 2 + 1);
        assert_eq!(data[data.len() - 1], 0b0010_0001);
    }

    #[test]
    fn blur_layout() {
        let data = roundtrip(Filter::Blur(BlurFilter::new(Blur::default(), 3)));
        assert_eq!(data, [1, 0, 0, 0, 0, 0, 0, 0, 0, 0b0001_1000]);
    }

    fn reencode(data: &[u8]) -> Vec<u8> {
        let filter = Filter::read(&mut BitReader::new(data)).unwrap();

        let mut writer = BitWriter::new();
        filter.write(&mut writer).unwrap();
        writer.into_inner()
    }

    #[test]
    fn reserved_bits_are_preserved() {
        // Blur with 3 passes and all reserved bits set.
        let blur = [1, 0, 0, 0, 0, 0, 0, 0, 0, 0b0001_1111];
        assert_eq!(reencode(&blur), blur);
        assert_eq!(
            Filter::read(&mut BitReader::new(&blur)).unwrap(),
            Filter::Blur(BlurFilter::new(Blur::default(), 3))
        );

        // 1x1 convolution with reserved bits 101010 before clamp.
        #[rustfmt::skip]
        let convolution = [
            5, 1, 1,
            0x00, 0x00, 0x80, 0x3F,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x80, 0x3F,
            0, 0, 0, 0,
            0b1010_1010,
        ];
        assert_eq!(reencode(&convolution), convolution);
    }

    #[test]
    fn bevel_and_gradients() {
        let mode = FilterMode {
            inner: true,
            on_top: true,
            passes: 15,
            ..Default::default()
        };

        roundtrip(Filter::Bevel(BevelFilter {
            shadow_color: Rgba::new(1, 2, 3, 4),
            highlight_color: Rgba::new(5, 6, 7, 8),
            mode,
            ..Default::default()
        }));

        let gradient = GradientFilter {
            stops: vec![
                GradientStop {
                    color: Rgba::new(0xFF, 0, 0, 0xFF),
                    ratio: 0,
                },
                GradientStop {
                    color: Rgba::new(0, 0, 0xFF, 0x80),
                    ratio: 0xFF,
                },
            ],
            strength: Fixed8::from_f32(1.5),
            mode,
            ..Default::default()
        };
        roundtrip(Filter::GradientGlow(gradient.clone()));
        roundtrip(Filter::GradientBevel(gradient));
    }

    #[test]
    fn convolution_and_color_matrix() {
        roundtrip(Filter::Convolution(ConvolutionFilter {
            matrix_x: 3,
            matrix_y: 1,
            divisor: 1.0,
            bias: 0.0,
            matrix: vec![0.25, 0.5, 0.25],
            default_color: Rgba::new(0, 0, 0, 0),
            clamp: true,
            preserve_alpha: false,
            ..Default::default()
        }));

        let mut matrix = Box::new([0.0; 20]);
        for (i, v) in matrix.iter_mut().enumerate() {
            *v = i as f32;
        }
        roundtrip(Filter::ColorMatrix(matrix));
    }

    #[test]
    fn unknown_filter() {
        assert!(matches!(
            Filter::read(&mut BitReader::new(&[8])),
            Err(DecodeError::MalformedField {
                field: Field::SurfaceFilterList,
                ..
            })
        ));
    }

    #[test]
    fn passes_out_of_range() {
        let filter = Filter::Bevel(BevelFilter {
            mode: FilterMode {
                on_top: true,
                passes: 16,
                ..Default::default()
            },
            ..Default::default()
        });

        let mut writer = BitWriter::new();
        assert!(matches!(
            filter.write(&mut writer),
            Err(EncodeError::ValueOutOfRange { .. })
        ));
    }
}
