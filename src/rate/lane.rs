use crate::adapter::sample::{read, write};

/// How many samples at each end of a lane are kept unmodified
const EDGE: usize = 128;
/// How many overwritten samples are remembered
const RING: usize = 128;

/// The direction a kernel writes its output in
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Order {
    /// Output positions increase one by one (the data shrinks)
    Forward,
    /// Output positions decrease one by one (the data grows)
    Backward,
}

/// One channel of an interleaved 16 bit buffer that is being filtered in place.
///
/// Kernels read input samples relative to any position and write output samples
/// in a fixed [`Order`]. Input that has already been overwritten is served from a
/// small ring of saved samples, which is enough as long as the kernel never reads
/// further than `RING / 2` samples behind its write position.
/// Both edges of the input are snapshotted up front so looping reads can wrap around.
pub struct Lane<'a> {
    buf: &'a mut [u8],
    stride: usize,
    offset: usize,
    len: usize,
    looping: bool,
    order: Order,
    /// Forward: positions below are overwritten. Backward: positions at or above are.
    mark: usize,
    head: [i16; EDGE],
    tail: [i16; EDGE],
    ring: [i16; RING],
}

impl<'a> Lane<'a> {
    pub fn new(
        buf: &'a mut [u8],
        stride: usize,
        offset: usize,
        len: usize,
        looping: bool,
        order: Order,
    ) -> Self {
        let mut lane = Self {
            buf,
            stride,
            offset,
            len,
            looping,
            order,
            mark: match order {
                Order::Forward => 0,
                Order::Backward => usize::MAX,
            },
            head: [0; EDGE],
            tail: [0; EDGE],
            ring: [0; RING],
        };
        for i in 0..len.min(EDGE) {
            lane.head[i] = lane.raw(i);
        }
        if len > EDGE {
            for i in 0..EDGE {
                lane.tail[i] = lane.raw(len - EDGE + i);
            }
        }
        lane
    }
    /// Number of input samples
    pub const fn len(&self) -> usize {
        self.len
    }
    /// Input sample `pos`. Out of range positions are silence, or wrap around when looping.
    #[expect(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn get(&self, pos: isize) -> i16 {
        let len = self.len as isize;
        let idx = if (0..len).contains(&pos) {
            pos as usize
        } else if self.looping && len > 0 {
            pos.rem_euclid(len) as usize
        } else {
            return 0;
        };
        if idx < EDGE {
            self.head[idx]
        } else if idx + EDGE >= self.len {
            self.tail[idx + EDGE - self.len]
        } else if self.overwritten(idx) {
            self.ring[idx % RING]
        } else {
            self.raw(idx)
        }
    }
    /// Write output sample `pos`. Positions must follow the lane's [`Order`] one by one.
    pub fn put(&mut self, pos: usize, value: i16) {
        debug_assert!(match self.order {
            Order::Forward => pos == self.mark,
            Order::Backward => pos < self.mark,
        });
        if pos < self.len {
            self.ring[pos % RING] = self.raw(pos);
        }
        write(self.buf, pos * self.stride + self.offset, value);
        self.mark = match self.order {
            Order::Forward => pos + 1,
            Order::Backward => pos,
        };
    }
    const fn overwritten(&self, idx: usize) -> bool {
        match self.order {
            Order::Forward => idx < self.mark,
            Order::Backward => idx >= self.mark,
        }
    }
    fn raw(&self, pos: usize) -> i16 {
        read(self.buf, pos * self.stride + self.offset)
    }
}

#[test]
fn test_lane_history() {
    let samples: Vec<i16> = (0..400).collect();
    let mut buf: Vec<u8> = bytemuck::cast_slice(&samples).to_vec();
    buf.resize(800 * 2, 0);
    let mut lane = Lane::new(&mut buf, 1, 0, 400, false, Order::Backward);
    // Grow by two, reading 20 samples ahead of the input position
    for k in (0..400).rev() {
        assert_eq!(lane.get(k as isize + 20), if k + 20 < 400 { k + 20 } else { 0 });
        assert_eq!(lane.get(k as isize), k);
        lane.put(2 * k as usize + 1, -1);
        lane.put(2 * k as usize, -1);
    }
    assert_eq!(lane.get(-1), 0);
    let mut lane = Lane::new(&mut buf, 1, 0, 800, true, Order::Forward);
    for k in 0..800 {
        assert_eq!(lane.get(k - 40), -1);
        lane.put(k as usize, k as i16);
    }
}

#[test]
fn test_lane_stride_and_wrap() {
    let samples: [i16; 6] = [1, 10, 2, 20, 3, 30];
    let mut buf: Vec<u8> = bytemuck::cast_slice(&samples).to_vec();
    let lane = Lane::new(&mut buf, 2, 1, 3, true, Order::Forward);
    assert_eq!(lane.get(-1), 30);
    assert_eq!(lane.get(4), 20);
    assert_eq!(lane.get(1), 20);
    let lane = Lane::new(&mut buf, 2, 0, 3, false, Order::Forward);
    assert_eq!(lane.get(3), 0);
    assert_eq!(lane.get(2), 3);
}
