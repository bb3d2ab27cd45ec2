/// A pair of equally-sized targets used alternately as read source and write
/// destination.
///
/// [`PingPong::split`] hands out the read slot shared and the write slot
/// exclusive, so one step can never read and write the same target.
#[derive(Debug)]
pub struct PingPong<T> {
    slots: [T; 2],
    read: usize,
    swaps: u64,
}

impl<T> PingPong<T> {
    pub fn new(a: T, b: T) -> Self {
        Self {
            slots: [a, b],
            read: 0,
            swaps: 0,
        }
    }

    #[inline]
    pub fn read(&self) -> &T {
        &self.slots[self.read]
    }

    #[inline]
    pub fn write(&self) -> &T {
        &self.slots[1 - self.read]
    }

    pub fn split(&mut self) -> (&T, &mut T) {
        let [a, b] = &mut self.slots;
        if self.read == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Make the just-written slot the read slot.
    #[inline]
    pub fn swap(&mut self) {
        self.read = 1 - self.read;
        self.swaps += 1;
    }

    #[inline]
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub fn into_inner(self) -> [T; 2] {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_alternates_slots_after_each_swap() {
        let mut pp = PingPong::new('a', 'b');
        let (r, w) = pp.split();
        assert_eq!((*r, *w), ('a', 'b'));
        pp.swap();
        let (r, w) = pp.split();
        assert_eq!((*r, *w), ('b', 'a'));
        pp.swap();
        assert_eq!(*pp.read(), 'a');
        assert_eq!(*pp.write(), 'b');
        assert_eq!(pp.swaps(), 2);
    }

    #[test]
    fn writes_land_in_the_slot_read_next() {
        let mut pp = PingPong::new(0, 0);
        for i in 1..=5 {
            let (r, w) = pp.split();
            *w = *r + i;
            pp.swap();
        }
        assert_eq!(*pp.read(), 15);
        let [a, b] = pp.into_inner();
        assert_eq!(a.max(b), 15);
    }
}
