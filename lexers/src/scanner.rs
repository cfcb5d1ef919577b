#![deny(warnings)]

// A buffered scanner. Items accepted since the last extract form the
// current token, everything past them is lookahead.
pub struct Scanner<I: Iterator> where I::Item: Clone {
    src: I,
    buf: Vec<I::Item>,
    taken: usize,
}

impl<I> Iterator for Scanner<I> where I: Iterator, I::Item: Clone {
    type Item = I::Item;
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.peek()?;
        self.taken += 1;
        Some(item)
    }
}

impl<I> Scanner<I> where I: Iterator, I::Item: Clone {
    pub fn new(source: I) -> Scanner<I> {
        Scanner{src: source, buf: Vec::new(), taken: 0}
    }

    // give back every accepted item past `mark`
    pub fn reset(&mut self, mark: usize) {
        self.taken = mark.min(self.taken);
    }

    fn fill(&mut self, n: usize) -> bool {
        while self.buf.len() < n {
            match self.src.next() {
                Some(item) => self.buf.push(item),
                None => return false,
            }
        }
        true
    }

    pub fn peek(&mut self) -> Option<I::Item> {
        if self.fill(self.taken + 1) {
            Some(self.buf[self.taken].clone())
        } else {
            None
        }
    }

    pub fn view(&self) -> &[I::Item] { &self.buf[..self.taken] }

    pub fn extract(&mut self) -> Vec<I::Item> {
        let token = self.buf.drain(..self.taken).collect();
        self.taken = 0;
        token
    }

    pub fn ignore(&mut self) { self.extract(); }
}

impl<I> Scanner<I> where I: Iterator, I::Item: Clone + PartialEq {
    pub fn accept(&mut self, what: &I::Item) -> Option<I::Item> {
        self.accept_if(|next| next == what)
    }

    pub fn accept_if<F>(&mut self, pred: F) -> Option<I::Item>
            where F: Fn(&I::Item) -> bool {
        match self.peek() {
            Some(ref next) if pred(next) => self.next(),
            _ => None,
        }
    }
}

impl<I: Iterator<Item=char>> Scanner<I> {
    pub fn extract_string(&mut self) -> String {
        self.extract().into_iter().collect()
    }

    pub fn accept_char(&mut self, c: char) -> bool {
        self.accept(&c).is_some()
    }

    pub fn until_any_char(&mut self, any: &str) -> bool {
        let mut advanced = false;
        while let Some(next) = self.peek() {
            if any.contains(next) { break; }
            self.taken += 1;
            advanced = true;
        }
        advanced
    }

    pub fn skip_ws(&mut self) -> bool {
        let mut advanced = false;
        while self.accept_if(|c| c.is_whitespace()).is_some() { advanced = true; }
        advanced
    }
}
