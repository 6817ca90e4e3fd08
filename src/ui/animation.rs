use std::io::Write;
use std::time::Duration;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// 純視覺效果。[`ShuffleAnimation::play`] 返回即代表動畫完成，Session 以此為訊號。
#[derive(Debug, Clone)]
pub struct ShuffleAnimation {
    frames: u32,
    delay: Duration,
}

impl ShuffleAnimation {
    pub fn new(frames: u32, delay: Duration) -> Self {
        Self { frames, delay }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn frame_count(&self) -> u32 {
        self.frames
    }

    pub fn frame(&self, index: u32) -> String {
        let width = 10usize;
        let filled = if self.frames == 0 {
            width
        } else {
            ((index + 1) as usize * width / self.frames as usize).min(width)
        };
        format!(
            "Shuffling {} [{}{}]",
            SPINNER[index as usize % SPINNER.len()],
            "#".repeat(filled),
            ".".repeat(width - filled)
        )
    }

    pub fn play<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for index in 0..self.frames {
            write!(out, "\r{}", self.frame(index))?;
            out.flush()?;
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        if self.frames > 0 {
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_fill_up() {
        let animation = ShuffleAnimation::new(4, Duration::ZERO);
        assert_eq!(animation.frame(0), "Shuffling | [##........]");
        assert_eq!(animation.frame(3), "Shuffling \\ [##########]");
    }

    #[test]
    fn test_play_writes_every_frame() {
        let animation = ShuffleAnimation::new(3, Duration::ZERO);
        let mut out = Vec::new();
        animation.play(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Shuffling").count(), 3);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_disabled_animation_is_silent() {
        let mut out = Vec::new();
        ShuffleAnimation::disabled().play(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
