//! C3 — Audio Resampler & FIFO.
//!
//! A bounded, thread-safe ring buffer (the *FIFO*) sits between the
//! module's `retro_run`-time audio callbacks (the writer) and whatever
//! pulls queued audio out to [`HostAudio`] (the reader, possibly on a
//! separate thread). An adaptive-ratio resampler sits in front of the
//! FIFO's write side, nudging its own output rate up or down a few tenths
//! of a percent depending on how full the FIFO currently is, so small
//! clock drift between the module's native rate and the host's output
//! rate never under- or over-runs the buffer.

use parking_lot::Mutex;

use crate::traits::HostAudio;

/// `8192` `i16` samples == `4096` stereo frames, matching the original's
/// fixed `int16_t samples[8192]` batch buffer.
pub const FIFO_CAPACITY: usize = 8192;

/// The ring buffer's internal state. Field names follow spec.md's
/// `{buffer, avail, first, last}` directly: `avail` is the occupied sample
/// count, `first`/`last` are the read/write cursors.
struct Inner {
    buffer: Vec<i16>,
    avail: usize,
    first: usize,
    last: usize,
}

impl Inner {
    fn free(&self) -> usize {
        self.buffer.len() - self.avail
    }

    fn write(&mut self, src: &[i16]) -> usize {
        let n = src.len().min(self.free());
        let cap = self.buffer.len();
        let tail_space = cap - self.last;

        if n <= tail_space {
            self.buffer[self.last..self.last + n].copy_from_slice(&src[..n]);
        } else {
            self.buffer[self.last..].copy_from_slice(&src[..tail_space]);
            self.buffer[..n - tail_space].copy_from_slice(&src[tail_space..n]);
        }

        self.last = (self.last + n) % cap;
        self.avail += n;
        n
    }

    fn read(&mut self, dst: &mut [i16]) -> usize {
        let n = dst.len().min(self.avail);
        let cap = self.buffer.len();
        let tail_space = cap - self.first;

        if n <= tail_space {
            dst[..n].copy_from_slice(&self.buffer[self.first..self.first + n]);
        } else {
            dst[..tail_space].copy_from_slice(&self.buffer[self.first..]);
            dst[tail_space..n].copy_from_slice(&self.buffer[..n - tail_space]);
        }

        self.first = (self.first + n) % cap;
        self.avail -= n;
        n
    }
}

/// The bounded ring buffer itself. Capacity is fixed at construction and
/// must be a power of two (spec.md §3); every operation is guarded by a
/// single `parking_lot::Mutex`, the one piece of this crate with internal
/// synchronization.
pub struct Fifo {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl Fifo {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "FIFO capacity must be a power of two");

        Self {
            inner: Mutex::new(Inner {
                buffer: vec![0; capacity],
                avail: 0,
                first: 0,
                last: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes `min(src.len(), free())` samples, silently truncating on
    /// overrun rather than blocking or erroring.
    pub fn write(&self, src: &[i16]) -> usize {
        self.inner.lock().write(src)
    }

    /// Reads `min(dst.len(), occupied())` samples, silently truncating on
    /// underrun.
    pub fn read(&self, dst: &mut [i16]) -> usize {
        self.inner.lock().read(dst)
    }

    pub fn occupied(&self) -> usize {
        self.inner.lock().avail
    }

    pub fn free(&self) -> usize {
        self.inner.lock().free()
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.avail = 0;
        inner.first = 0;
        inner.last = 0;
    }
}

/// How far `currentRatio` is allowed to drift from `originalRatio` per
/// batch, in either direction. Matches the original's fixed
/// `rateControlDelta = 0.005`.
const RATE_CONTROL_DELTA: f64 = 0.005;

/// Adapts the module's native audio rate to the host's output rate,
/// nudging its resample ratio based on how full the downstream FIFO is.
/// Channel count is fixed at 2 and bit depth at 16, per spec.md §4.3.
pub(crate) struct Resampler {
    core_rate: f64,
    host_rate: f64,
    original_ratio: f64,
    current_ratio: f64,
    scratch: Vec<i16>,
}

impl Resampler {
    pub fn new(core_rate: f64, host_rate: f64) -> Self {
        let original_ratio = host_rate / core_rate;

        Self {
            core_rate,
            host_rate,
            original_ratio,
            current_ratio: original_ratio,
            scratch: Vec::new(),
        }
    }

    pub fn current_ratio(&self) -> f64 {
        self.current_ratio
    }

    pub fn core_rate(&self) -> f64 {
        self.core_rate
    }

    pub fn host_rate(&self) -> f64 {
        self.host_rate
    }

    /// Steps 1–6 of spec.md §4.3: reads how full `fifo` is, derives
    /// `currentRatio`, resamples `batch` (interleaved stereo `i16` at
    /// `coreRate`) into the FIFO at the adapted rate, and returns how many
    /// samples were actually written.
    pub fn push_batch(&mut self, fifo: &Fifo, batch: &[i16]) -> usize {
        let avail = fifo.free() as f64;
        let half_size = fifo.capacity() as f64 / 2.0;
        let direction = (avail - half_size) / half_size;

        self.current_ratio = self.original_ratio * (1.0 + RATE_CONTROL_DELTA * direction);

        // hostRate * currentRatio / originalRatio, expressed as an
        // input→output frame ratio, reduces to `currentRatio` directly
        // since `originalRatio == hostRate / coreRate`.
        resample(batch, self.current_ratio, &mut self.scratch);

        // Whole stereo frames only.
        let even_len = self.scratch.len() & !1;
        fifo.write(&self.scratch[..even_len])
    }
}

/// Resamples interleaved stereo `i16` frames from `input` by `ratio`
/// (`output_frames ≈ input_frames * ratio`), linearly interpolating
/// between adjacent input frames. At `ratio == 1.0` this degenerates to a
/// straight copy.
fn resample(input: &[i16], ratio: f64, out: &mut Vec<i16>) {
    out.clear();

    let in_frames = input.len() / 2;
    if in_frames == 0 {
        return;
    }

    if (ratio - 1.0).abs() < f64::EPSILON {
        out.extend_from_slice(input);
        return;
    }

    let out_frames = ((in_frames as f64) * ratio).round().max(1.0) as usize;
    out.reserve(out_frames * 2);

    for i in 0..out_frames {
        let src_pos = i as f64 / ratio;
        let idx0 = (src_pos.floor() as usize).min(in_frames - 1);
        let idx1 = (idx0 + 1).min(in_frames - 1);
        let frac = src_pos - idx0 as f64;

        for channel in 0..2 {
            let a = input[idx0 * 2 + channel] as f64;
            let b = input[idx1 * 2 + channel] as f64;
            let sample = a + (b - a) * frac;
            out.push(sample.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16);
        }
    }
}

/// Owns the resampler, the FIFO it feeds, and the host-side playback
/// handle it drains into once per frame.
pub(crate) struct AudioPipeline<A: HostAudio> {
    fifo: Fifo,
    resampler: Resampler,
    source: A::Source,
    drain: Vec<i16>,
    drain_bytes: Vec<u8>,
}

impl<A: HostAudio> AudioPipeline<A> {
    pub fn new(host: &mut A, core_rate: f64, host_rate: f64) -> Self {
        Self {
            fifo: Fifo::new(FIFO_CAPACITY),
            resampler: Resampler::new(core_rate, host_rate),
            source: host.new_source(host_rate as u32),
            drain: vec![0; FIFO_CAPACITY],
            drain_bytes: Vec::with_capacity(FIFO_CAPACITY * 2),
        }
    }

    /// Feeds one batch of interleaved stereo samples (as produced by the
    /// module's `retro_audio_sample_batch` callback) through the adaptive
    /// resampler into the FIFO.
    pub fn mix(&mut self, batch: &[i16]) {
        self.resampler.push_batch(&self.fifo, batch);
    }

    /// Drains whatever is currently sitting in the FIFO and queues it to
    /// the host. Called once per `step()`, after `mix` has had a chance to
    /// run — this is the "host audio puller" side of the FIFO from
    /// spec.md §4.3, folded into the same per-frame boundary the video
    /// pipeline publishes on.
    pub fn drain_to_host(&mut self, host: &mut A) {
        let occupied = self.fifo.occupied();
        if occupied == 0 {
            return;
        }

        let n = self.fifo.read(&mut self.drain[..occupied.min(self.drain.len())]);
        self.drain_bytes.clear();
        self.drain_bytes
            .extend(self.drain[..n].iter().flat_map(|sample| sample.to_le_bytes()));

        host.queue(&mut self.source, &self.drain_bytes, self.resampler.host_rate() as u32);

        if !host.is_playing(&self.source) {
            host.play(&mut self.source);
        }
    }

    pub fn fifo(&self) -> &Fifo {
        &self.fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn occupied_and_free_always_sum_to_capacity() {
        let fifo = Fifo::new(8192);
        assert_eq!(fifo.occupied() + fifo.free(), 8192);

        fifo.write(&vec![1i16; 100]);
        assert_eq!(fifo.occupied() + fifo.free(), 8192);

        let mut dst = vec![0i16; 40];
        fifo.read(&mut dst);
        assert_eq!(fifo.occupied() + fifo.free(), 8192);
    }

    #[test]
    fn write_then_read_round_trips() {
        let fifo = Fifo::new(16);
        let data: Vec<i16> = (0..10).collect();

        assert_eq!(fifo.write(&data), 10);

        let mut dst = vec![0i16; 10];
        assert_eq!(fifo.read(&mut dst), 10);
        assert_eq!(dst, data);
    }

    #[test]
    fn write_truncates_on_overrun() {
        let fifo = Fifo::new(8);
        let data: Vec<i16> = (0..20).collect();

        assert_eq!(fifo.write(&data), 8);
        assert_eq!(fifo.occupied(), 8);
    }

    #[test]
    fn read_truncates_on_underrun() {
        let fifo = Fifo::new(8);
        fifo.write(&[1, 2, 3]);

        let mut dst = vec![0i16; 8];
        assert_eq!(fifo.read(&mut dst), 3);
    }

    #[test]
    fn wraps_correctly_across_the_end() {
        let fifo = Fifo::new(8);
        fifo.write(&[1, 2, 3, 4, 5, 6]);

        let mut dst = vec![0i16; 4];
        fifo.read(&mut dst);
        assert_eq!(dst, vec![1, 2, 3, 4]);

        // Write wraps past the end of the backing buffer.
        assert_eq!(fifo.write(&[7, 8, 9, 10]), 4);

        let mut dst = vec![0i16; 6];
        assert_eq!(fifo.read(&mut dst), 6);
        assert_eq!(dst, vec![5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn adaptive_ratio_matches_literal_scenario() {
        // FIFO size 8192, host rate 48000, core rate 32000.
        let fifo = Fifo::new(8192);
        let mut resampler = Resampler::new(32000.0, 48000.0);
        assert!((resampler.original_ratio - 1.5).abs() < 1e-9);

        // free() == 4096 == half: direction == 0, currentRatio == 1.5.
        fifo.write(&vec![0i16; 4096]);
        assert_eq!(fifo.free(), 4096);
        resampler.push_batch(&fifo, &[0i16; 2]);
        assert!((resampler.current_ratio() - 1.5).abs() < 1e-9);

        // free() == 6144: direction == 0.5, currentRatio == 1.5 * 1.0025.
        fifo.reset();
        fifo.write(&vec![0i16; 2048]);
        assert_eq!(fifo.free(), 6144);
        resampler.push_batch(&fifo, &[0i16; 2]);
        assert!((resampler.current_ratio() - 1.5 * 1.0025).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn occupied_plus_free_is_always_capacity(
            ops in proptest::collection::vec((any::<bool>(), 0usize..50), 1..100),
        ) {
            let fifo = Fifo::new(64);
            for (is_write, n) in ops {
                if is_write {
                    fifo.write(&vec![0i16; n]);
                } else {
                    let mut dst = vec![0i16; n];
                    fifo.read(&mut dst);
                }
                prop_assert_eq!(fifo.occupied() + fifo.free(), 64);
            }
        }
    }
}
