use rand::Rng;

/// Number of identifiers generated per fill.
pub const IP_ID_COUNT: usize = 8192;

/// Pre-generated unpredictable 16-bit identifiers, handed out round-robin.
pub struct IdPool {
    ids: Vec<u16>,
    next: usize,
}

impl IdPool {
    pub fn new() -> Self {
        let mut pool = Self {
            ids: vec![0; IP_ID_COUNT],
            next: 0,
        };
        pool.reseed();
        pool
    }

    /// Regenerates every identifier and restarts the cursor.
    pub fn reseed(&mut self) {
        rand::rng().fill(&mut self.ids[..]);
        self.next = 0;
    }

    #[inline]
    pub fn next_id(&mut self) -> u16 {
        let id = self.ids[self.next];
        self.next = (self.next + 1) % self.ids.len();
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new()
    }
}
