use ratatui::Frame;

pub trait Draw {
    fn draw(&self, frame: &mut Frame);
}
